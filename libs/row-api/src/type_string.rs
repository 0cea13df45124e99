//! Разбор строковых описаний типов.
//!
//! Таблица описывает колонки двумя строками: имена через запятую и список
//! типов вида `bigint,array<string>,map<string,struct<a:int,b:double>>`.
//! Типы верхнего уровня разделяются `,` или `:`.

use crate::error::SchemaError;
use crate::schema::{Field, RecordType, ScalarKind, TypeNode};

/// Разобрать ровно одно описание типа.
pub fn parse_type(text: &str) -> Result<TypeNode, SchemaError> {
    let mut parser = Parser::new(text);
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(ty)
}

/// Разобрать список типов верхнего уровня.
pub fn parse_type_list(text: &str) -> Result<Vec<TypeNode>, SchemaError> {
    let mut parser = Parser::new(text);
    let mut types = Vec::new();
    loop {
        types.push(parser.parse_type()?);
        parser.skip_ws();
        match parser.peek() {
            None => break,
            Some(b',' | b':') => parser.bump(),
            Some(_) => return Err(parser.error("expected ',' or ':' between column types")),
        }
    }
    Ok(types)
}

/// Собрать корневую запись из списка имён и списка типов.
pub fn parse_columns(names: &str, types: &str) -> Result<RecordType, SchemaError> {
    if names.trim().is_empty() {
        return Err(SchemaError::NoColumns);
    }
    if types.trim().is_empty() {
        return Err(SchemaError::NoColumnTypes);
    }

    let names: Vec<&str> = names.split(',').map(str::trim).collect();
    let types = parse_type_list(types)?;
    if names.len() != types.len() {
        return Err(SchemaError::ColumnCountMismatch {
            names: names.len(),
            types: types.len(),
        });
    }

    RecordType::new(names.into_iter().zip(types).map(|(name, ty)| Field::new(name, ty)))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> SchemaError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> SchemaError {
        SchemaError::InvalidTypeString {
            offset,
            message: message.into(),
        }
    }

    fn expect(&mut self, ch: u8) -> Result<(), SchemaError> {
        self.skip_ws();
        if self.peek() == Some(ch) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", ch as char)))
        }
    }

    /// `[A-Za-z0-9_]*` после пропуска пробелов.
    fn ident(&mut self) -> &'a str {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn parse_type(&mut self) -> Result<TypeNode, SchemaError> {
        self.skip_ws();
        let start = self.pos;
        let word = self.ident();
        if word.is_empty() {
            return Err(self.error("expected type name"));
        }

        let ty = match word.to_ascii_lowercase().as_str() {
            "boolean" => ScalarKind::Bool.into(),
            "tinyint" => ScalarKind::Int8.into(),
            "smallint" => ScalarKind::Int16.into(),
            "int" => ScalarKind::Int32.into(),
            "bigint" => ScalarKind::Int64.into(),
            "float" => ScalarKind::Float32.into(),
            "double" => ScalarKind::Float64.into(),
            "string" => ScalarKind::Text.into(),
            "void" => ScalarKind::Void.into(),
            "array" => {
                self.expect(b'<')?;
                let element = self.parse_type()?;
                self.expect(b'>')?;
                TypeNode::list(element)
            }
            "map" => {
                self.expect(b'<')?;
                let key = self.parse_type()?;
                self.expect(b',')?;
                let value = self.parse_type()?;
                self.expect(b'>')?;
                TypeNode::map(key, value)?
            }
            "struct" => {
                self.expect(b'<')?;
                TypeNode::record(self.parse_struct_fields()?)?
            }
            other => return Err(self.error_at(start, format!("unknown type '{other}'"))),
        };
        Ok(ty)
    }

    /// `name:type, ...>`, открывающая `<` уже прочитана.
    fn parse_struct_fields(&mut self) -> Result<Vec<Field>, SchemaError> {
        let mut fields = Vec::new();
        loop {
            let name = self.ident();
            if name.is_empty() {
                return Err(self.error("expected field name"));
            }
            self.expect(b':')?;
            let ty = self.parse_type()?;
            fields.push(Field::new(name, ty));

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.bump(),
                Some(b'>') => {
                    self.bump();
                    return Ok(fields);
                }
                _ => return Err(self.error("expected ',' or '>' in struct")),
            }
        }
    }
}
