//! Column schema types and the fixed lexical markers of the ZOON wire form.

/// Null marker, used in row cells and header constants.
pub const NULL_MARKER: &str = "~";

/// Boolean tokens for row cells and tabular-header constants.
pub const BOOL_TRUE: &str = "1";
/// See [`BOOL_TRUE`].
pub const BOOL_FALSE: &str = "0";

/// Boolean tokens for the inline (non-tabular) form and bool constants.
pub const INLINE_BOOL_TRUE: &str = "y";
/// See [`INLINE_BOOL_TRUE`].
pub const INLINE_BOOL_FALSE: &str = "n";

/// Column type codes as they appear after `:` in a ZOON header.
///
/// `Str` doubles as the carrier for enum columns (the header uses the
/// `key=a|b` / `key!a|b` forms instead of a type code for those).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    /// `s` — short string, underscore-encoded.
    Str,
    /// `i` — integer.
    Int,
    /// `n` — number (integer or float).
    Num,
    /// `b` — boolean, `1`/`0` in cells.
    Bool,
    /// `i+` — auto-increment; rows carry no token, values are 1..N.
    AutoInc,
    /// `t` — long text, quoted with `\"` escapes.
    Text,
}

impl TypeCode {
    /// The header spelling of this type code.
    pub fn as_code(self) -> &'static str {
        match self {
            TypeCode::Str => "s",
            TypeCode::Int => "i",
            TypeCode::Num => "n",
            TypeCode::Bool => "b",
            TypeCode::AutoInc => "i+",
            TypeCode::Text => "t",
        }
    }

    /// Parse a header type code. Unknown codes fall back to `Str`, which
    /// gives the decoder's most permissive cell interpretation.
    pub fn from_code(code: &str) -> Self {
        match code {
            "i" => TypeCode::Int,
            "n" => TypeCode::Num,
            "b" => TypeCode::Bool,
            "i+" => TypeCode::AutoInc,
            "t" => TypeCode::Text,
            _ => TypeCode::Str,
        }
    }
}

/// One tabular column: a dotted path plus how its cells are rendered.
///
/// The encoder builds these during schema inference; the decoder rebuilds
/// them from the header line. On the encoder side `enum_values` holds the
/// raw (decoded) strings; on the decoder side it holds the header tokens
/// as written, underscore-decoded only when a cell resolves against them.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Flattened dotted path, e.g. `infrastructure.postgres.status`.
    pub key: String,
    pub ty: TypeCode,
    /// Allowed value set for enum columns, in header order.
    pub enum_values: Option<Vec<String>>,
    /// Whether enum cells carry 0-based indices instead of literals.
    pub indexed: bool,
}
