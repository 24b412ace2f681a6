use std::fmt::{self, Display};

/// Binding levels inside the arithmetic part of the cascade.
///
/// - (unary) - ! : handled by the unary rule, tighter than all below
/// - * / % ^ : multiplicative
/// - + - : additive
/// - & | : logical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Logical,
    Additive,
    Multiplicative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
    And,
    Or,
    Not,
}

impl Operator {
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        let operator = match symbol {
            "+" => Operator::Add,
            "-" => Operator::Subtract,
            "*" => Operator::Multiply,
            "/" => Operator::Divide,
            "^" => Operator::Power,
            "%" => Operator::Modulo,
            "&" => Operator::And,
            "|" => Operator::Or,
            "!" => Operator::Not,
            _ => return None,
        };
        Some(operator)
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
            Operator::Modulo => "%",
            Operator::And => "&",
            Operator::Or => "|",
            Operator::Not => "!",
        }
    }

    #[must_use]
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Subtract | Operator::Not)
    }

    /// `None` for operators that only appear in prefix position.
    #[must_use]
    pub fn precedence(self) -> Option<Precedence> {
        match self {
            Operator::And | Operator::Or => Some(Precedence::Logical),
            Operator::Add | Operator::Subtract => Some(Precedence::Additive),
            Operator::Multiply | Operator::Divide | Operator::Modulo | Operator::Power => {
                Some(Precedence::Multiplicative)
            }
            Operator::Not => None,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    GreaterThan,
    LessThan,
    GreaterThanEqual,
    LessThanEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Comparison> {
        let comparison = match symbol {
            ">" => Comparison::GreaterThan,
            "<" => Comparison::LessThan,
            ">=" => Comparison::GreaterThanEqual,
            "<=" => Comparison::LessThanEqual,
            "==" => Comparison::Equal,
            "!=" => Comparison::NotEqual,
            _ => return None,
        };
        Some(comparison)
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparison::GreaterThan => ">",
            Comparison::LessThan => "<",
            Comparison::GreaterThanEqual => ">=",
            Comparison::LessThanEqual => "<=",
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
        };
        write!(f, "{s}")
    }
}
