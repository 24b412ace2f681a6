use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Type {
    Number,
    Boolean,
    String,
    Function,
    Enum,
    Class,
    #[default]
    Unknown,
}

impl Type {
    #[must_use]
    pub fn is_known(self) -> bool {
        self != Type::Unknown
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Type::Number => "number",
            Type::Boolean => "boolean",
            Type::String => "string",
            Type::Function => "function",
            Type::Enum => "enum",
            Type::Class => "class",
            Type::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// The datatype keyword written in front of a declaration or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    Let,
    Number,
    Bool,
    String,
    Func,
    Enum,
    Class,
}

impl Datatype {
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Datatype> {
        let datatype = match keyword {
            "let" => Datatype::Let,
            "number" => Datatype::Number,
            "bool" => Datatype::Bool,
            "string" => Datatype::String,
            "func" => Datatype::Func,
            "enum" => Datatype::Enum,
            "class" => Datatype::Class,
            _ => return None,
        };
        Some(datatype)
    }

    /// `let` asks for inference, so it carries no type of its own.
    #[must_use]
    pub fn ty(self) -> Type {
        match self {
            Datatype::Let => Type::Unknown,
            Datatype::Number => Type::Number,
            Datatype::Bool => Type::Boolean,
            Datatype::String => Type::String,
            Datatype::Func => Type::Function,
            Datatype::Enum => Type::Enum,
            Datatype::Class => Type::Class,
        }
    }
}

impl Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Datatype::Let => "let",
            Datatype::Number => "number",
            Datatype::Bool => "bool",
            Datatype::String => "string",
            Datatype::Func => "func",
            Datatype::Enum => "enum",
            Datatype::Class => "class",
        };
        write!(f, "{s}")
    }
}
