//! Payload interpretation tags.

use std::fmt;

/// How a frame's payload bytes should be interpreted.
///
/// Decoding an unknown code yields [`DataType::NotFound`] rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    NotFound,
    Map,
    String,
    Int,
    Float,
    ListInt,
    ListFloat,
}

impl DataType {
    /// Every data type, in code order.
    pub const ALL: [DataType; 7] = [
        DataType::NotFound,
        DataType::Map,
        DataType::String,
        DataType::Int,
        DataType::Float,
        DataType::ListInt,
        DataType::ListFloat,
    ];

    /// Protocol code of this data type (`NotFound` is -1).
    pub const fn code(self) -> i32 {
        match self {
            DataType::NotFound => -1,
            DataType::Map => 1,
            DataType::String => 2,
            DataType::Int => 3,
            DataType::Float => 4,
            DataType::ListInt => 5,
            DataType::ListFloat => 6,
        }
    }

    /// Code as written into the 16-bit header field.
    ///
    /// `NotFound` is written as `0xFFFF`, the 16-bit two's complement of -1.
    pub const fn wire_code(self) -> u16 {
        self.code() as i16 as u16
    }

    /// Look up a data type by header code.
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => DataType::Map,
            2 => DataType::String,
            3 => DataType::Int,
            4 => DataType::Float,
            5 => DataType::ListInt,
            6 => DataType::ListFloat,
            _ => DataType::NotFound,
        }
    }

    /// Upper-case protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            DataType::NotFound => "NOT_FOUND",
            DataType::Map => "MAP",
            DataType::String => "STRING",
            DataType::Int => "INT",
            DataType::Float => "FLOAT",
            DataType::ListInt => "LIST_INT",
            DataType::ListFloat => "LIST_FLOAT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
