//! Type-encoding parser.
//!
//! Decodes the compact type-encoding strings a dynamic runtime reports for
//! methods and blocks, e.g. `q32@0:8q16q24` or `v@?@?<q@?qq>qq`. The first
//! type is the return type; every following type is an argument slot.
//! Frame offsets and type qualifiers are accepted and dropped.

use thiserror::Error;

use crate::{Signature, SignatureKind, TypeDescriptor};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Empty type encoding")]
    Empty,
    #[error("Unexpected end of type encoding")]
    UnexpectedEof,
    #[error("Unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("Array at offset {offset} is missing its length")]
    MissingArrayLength { offset: usize },
    #[error("Array length at offset {offset} is out of range")]
    ArrayLengthOverflow { offset: usize },
    #[error("Block signature at offset {offset} has no return type")]
    EmptyBlockSignature { offset: usize },
}

/// Type qualifiers that may prefix any encoding (`const`, `in`, `inout`,
/// `out`, `bycopy`, `byref`, `oneway`).
const QUALIFIERS: &[char] = &['r', 'n', 'N', 'o', 'O', 'R', 'V'];

/// Parse a full signature encoding.
pub fn parse_signature(kind: SignatureKind, src: &str) -> Result<Signature, EncodingError> {
    let mut parser = Parser::new(src);
    if parser.is_eof() {
        return Err(EncodingError::Empty);
    }
    let (return_type, arguments) = parser.parse_sequence(None)?;
    parser.expect_eof()?;
    Ok(Signature::new(kind, return_type, arguments))
}

/// Parse a single type encoding.
pub fn parse_type(src: &str) -> Result<TypeDescriptor, EncodingError> {
    let mut parser = Parser::new(src);
    if parser.is_eof() {
        return Err(EncodingError::Empty);
    }
    let ty = parser.expect_type()?;
    parser.expect_eof()?;
    Ok(ty)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<char, EncodingError> {
        let ch = self.peek().ok_or(EncodingError::UnexpectedEof)?;
        self.pos += 1;
        Ok(ch)
    }

    fn accept(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), EncodingError> {
        let offset = self.pos;
        match self.next()? {
            ch if ch == expected => Ok(()),
            found => Err(EncodingError::UnexpectedChar { found, offset }),
        }
    }

    fn expect_eof(&self) -> Result<(), EncodingError> {
        match self.peek() {
            None => Ok(()),
            Some(found) => Err(EncodingError::UnexpectedChar {
                found,
                offset: self.pos,
            }),
        }
    }

    fn skip_qualifiers(&mut self) {
        while matches!(self.peek(), Some(ch) if QUALIFIERS.contains(&ch)) {
            self.pos += 1;
        }
    }

    /// Frame offsets follow each top-level type in method encodings.
    fn skip_offset(&mut self) {
        self.accept('-');
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    /// Parse `return arg arg ...` until end of input or `terminator`.
    fn parse_sequence(
        &mut self,
        terminator: Option<char>,
    ) -> Result<(TypeDescriptor, Vec<TypeDescriptor>), EncodingError> {
        let return_type = self.expect_type()?;
        self.skip_offset();
        let mut arguments = Vec::new();
        loop {
            match (self.peek(), terminator) {
                (None, None) => break,
                (None, Some(_)) => return Err(EncodingError::UnexpectedEof),
                (Some(ch), Some(end)) if ch == end => break,
                _ => {}
            }
            arguments.push(self.expect_type()?);
            self.skip_offset();
        }
        Ok((return_type, arguments))
    }

    fn expect_type(&mut self) -> Result<TypeDescriptor, EncodingError> {
        self.skip_qualifiers();
        let offset = self.pos;
        let ty = match self.next()? {
            'v' => TypeDescriptor::Void,
            'B' => TypeDescriptor::Bool,
            'c' => TypeDescriptor::Char,
            'C' => TypeDescriptor::UChar,
            's' => TypeDescriptor::Short,
            'S' => TypeDescriptor::UShort,
            'i' => TypeDescriptor::Int,
            'I' => TypeDescriptor::UInt,
            'l' => TypeDescriptor::Long,
            'L' => TypeDescriptor::ULong,
            'q' => TypeDescriptor::LongLong,
            'Q' => TypeDescriptor::ULongLong,
            'f' => TypeDescriptor::Float,
            'd' => TypeDescriptor::Double,
            '*' => TypeDescriptor::CString,
            '#' => TypeDescriptor::Class,
            ':' => TypeDescriptor::Selector,
            '?' => TypeDescriptor::Unknown,
            '^' => TypeDescriptor::pointer(self.expect_type()?),
            '@' => self.parse_object()?,
            '{' => {
                let (name, fields) = self.parse_composite('}')?;
                TypeDescriptor::Struct { name, fields }
            }
            '(' => {
                let (name, fields) = self.parse_composite(')')?;
                TypeDescriptor::Union { name, fields }
            }
            '[' => self.parse_array(offset)?,
            found => return Err(EncodingError::UnexpectedChar { found, offset }),
        };
        Ok(ty)
    }

    /// After `@`: plain object, `@"ClassName"`, `@?` or `@?<signature>`.
    fn parse_object(&mut self) -> Result<TypeDescriptor, EncodingError> {
        if self.accept('?') {
            let offset = self.pos;
            if !self.accept('<') {
                return Ok(TypeDescriptor::opaque_callable());
            }
            if self.peek() == Some('>') {
                return Err(EncodingError::EmptyBlockSignature { offset });
            }
            let (return_type, arguments) = self.parse_sequence(Some('>'))?;
            self.expect('>')?;
            return Ok(TypeDescriptor::callable(Signature::closure(
                return_type,
                arguments,
            )));
        }
        if self.accept('"') {
            // The class name does not change how the reference is passed.
            while self.next()? != '"' {}
        }
        Ok(TypeDescriptor::Object)
    }

    fn parse_composite(
        &mut self,
        close: char,
    ) -> Result<(String, Vec<TypeDescriptor>), EncodingError> {
        let mut name = String::new();
        loop {
            match self.next()? {
                '=' => break,
                ch if ch == close => return Ok((name, Vec::new())),
                ch => name.push(ch),
            }
        }
        let mut fields = Vec::new();
        while !self.accept(close) {
            if self.is_eof() {
                return Err(EncodingError::UnexpectedEof);
            }
            fields.push(self.expect_type()?);
        }
        Ok((name, fields))
    }

    fn parse_array(&mut self, offset: usize) -> Result<TypeDescriptor, EncodingError> {
        let mut digits = String::new();
        while let Some(ch) = self.peek().filter(char::is_ascii_digit) {
            digits.push(ch);
            self.pos += 1;
        }
        if digits.is_empty() {
            return Err(EncodingError::MissingArrayLength { offset });
        }
        let len = digits
            .parse::<usize>()
            .map_err(|_| EncodingError::ArrayLengthOverflow { offset })?;
        let element = self.expect_type()?;
        self.expect(']')?;
        Ok(TypeDescriptor::array(len, element))
    }
}
