//! Operator tables
//!
//! Upstream operators arrive by name (`Add`, `ZeroFillShiftRight`, …). Both
//! tables are closed: a name that is not listed has no translation.

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation (-)
    Negate,
    /// Logical NOT (!)
    Not,
    /// Unary plus (+)
    Positive,
    /// Bitwise complement (^)
    BitwiseNot,
    /// Allocation (&)
    New,
}

impl UnaryOp {
    /// Every unary operator
    pub const ALL: [Self; 5] = [
        Self::Negate,
        Self::Not,
        Self::Positive,
        Self::BitwiseNot,
        Self::New,
    ];

    /// Look up an upstream operator name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Upstream operator name
    pub fn name(self) -> &'static str {
        match self {
            Self::Negate => "Negate",
            Self::Not => "Not",
            Self::Positive => "Positive",
            Self::BitwiseNot => "BitwiseNot",
            Self::New => "New",
        }
    }

    /// Canonical symbolic token
    pub fn token(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
            Self::Positive => "+",
            Self::BitwiseNot => "^",
            Self::New => "&",
        }
    }
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// Division (/)
    Divide,
    /// Remainder (%)
    Modulus,
    /// Equality (==)
    EqualTo,
    /// Inequality (!=)
    NotEqualTo,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqualTo,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqualTo,
    /// Logical AND (&&)
    And,
    /// Logical OR (||)
    Or,
    /// Bitwise AND (&)
    BitwiseAnd,
    /// Bitwise OR (|)
    BitwiseOr,
    /// Bitwise XOR (^)
    BitwiseXor,
    /// Left shift (<<)
    ShiftLeft,
    /// Arithmetic right shift (>>)
    ShiftRight,
    /// Logical right shift (>>>)
    ZeroFillShiftRight,
}

impl BinaryOp {
    /// Every binary operator
    pub const ALL: [Self; 19] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Modulus,
        Self::EqualTo,
        Self::NotEqualTo,
        Self::LessThan,
        Self::LessThanOrEqualTo,
        Self::GreaterThan,
        Self::GreaterThanOrEqualTo,
        Self::And,
        Self::Or,
        Self::BitwiseAnd,
        Self::BitwiseOr,
        Self::BitwiseXor,
        Self::ShiftLeft,
        Self::ShiftRight,
        Self::ZeroFillShiftRight,
    ];

    /// Look up an upstream operator name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Upstream operator name
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Modulus => "Modulus",
            Self::EqualTo => "EqualTo",
            Self::NotEqualTo => "NotEqualTo",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqualTo => "LessThanOrEqualTo",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqualTo => "GreaterThanOrEqualTo",
            Self::And => "And",
            Self::Or => "Or",
            Self::BitwiseAnd => "BitwiseAnd",
            Self::BitwiseOr => "BitwiseOr",
            Self::BitwiseXor => "BitwiseXor",
            Self::ShiftLeft => "ShiftLeft",
            Self::ShiftRight => "ShiftRight",
            Self::ZeroFillShiftRight => "ZeroFillShiftRight",
        }
    }

    /// Canonical symbolic token
    pub fn token(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulus => "%",
            Self::EqualTo => "==",
            Self::NotEqualTo => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqualTo => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqualTo => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::BitwiseAnd => "&",
            Self::BitwiseOr => "|",
            Self::BitwiseXor => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::ZeroFillShiftRight => ">>>",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_lookup() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_name(op.name()), Some(op));
        }
        for op in UnaryOp::ALL {
            assert_eq!(UnaryOp::from_name(op.name()), Some(op));
        }
    }

    #[test]
    fn test_lookup_is_closed() {
        assert_eq!(BinaryOp::from_name("Exponent"), None);
        assert_eq!(BinaryOp::from_name("+"), None);
        assert_eq!(UnaryOp::from_name("Typeof"), None);
    }
}
