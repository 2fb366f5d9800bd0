/// Server-assigned type identifier of a column
pub type Oid = u32;

/// Type identifiers of the built-in server types the default decoder table knows about
pub mod oid {
    use super::Oid;

    pub const BOOL: Oid = 16;
    pub const BYTEA: Oid = 17;
    pub const CHAR: Oid = 18;
    pub const NAME: Oid = 19;
    pub const INT8: Oid = 20;
    pub const INT2: Oid = 21;
    pub const INT4: Oid = 23;
    pub const TEXT: Oid = 25;
    pub const OID: Oid = 26;
    pub const JSON: Oid = 114;
    pub const FLOAT4: Oid = 700;
    pub const FLOAT8: Oid = 701;
    pub const VARCHAR: Oid = 1043;
    pub const DATE: Oid = 1082;
    pub const TIMESTAMP: Oid = 1114;
    pub const TIMESTAMPTZ: Oid = 1184;
    pub const NUMERIC: Oid = 1700;
    pub const UUID: Oid = 2950;
    pub const JSONB: Oid = 3802;
}

/// Raw `ExecStatusType` codes reported by the transport for a result object
pub mod exec_status {
    pub const EMPTY_QUERY: i32 = 0;
    pub const COMMAND_OK: i32 = 1;
    pub const TUPLES_OK: i32 = 2;
    pub const COPY_OUT: i32 = 3;
    pub const COPY_IN: i32 = 4;
    pub const BAD_RESPONSE: i32 = 5;
    pub const NONFATAL_ERROR: i32 = 6;
    pub const FATAL_ERROR: i32 = 7;
    pub const COPY_BOTH: i32 = 8;
    pub const SINGLE_TUPLE: i32 = 9;
}
