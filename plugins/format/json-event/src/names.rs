use std::collections::HashMap;

use row_api::{RecordType, TypeNode};

/// Имя поля в нижнем регистре → позиция, для одной формы записи.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    slots: HashMap<String, usize>,
}

impl FieldMap {
    fn for_record(record: &RecordType) -> Self {
        let slots = record
            .field_names()
            .iter()
            .enumerate()
            .map(|(slot, name)| (name.to_lowercase(), slot))
            .collect();
        Self { slots }
    }

    /// `name` уже в нижнем регистре. `None`: у ключа нет колонки в этой
    /// записи, он пропускается.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Таблицы имён без учёта регистра для каждой записи, достижимой из
/// корневой схемы: сам корень, поля-записи, элементы списков и значения map.
///
/// Строится один раз на схему, дальше только чтение.
///
/// Ключ таблицы: упорядоченный список имён полей записи, а не адрес узла.
/// Одна и та же форма в разных местах схемы делит одну таблицу, а
/// клонированная или пересобранная запись находит свою.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    tables: HashMap<Vec<String>, FieldMap>,
}

impl NameIndex {
    pub fn build(root: &RecordType) -> Self {
        let mut index = Self::default();
        index.visit_record(root);
        index
    }

    fn visit(&mut self, ty: &TypeNode) {
        match ty {
            TypeNode::Scalar(_) => {}
            TypeNode::List(element) => self.visit(element),
            TypeNode::Map(map) => self.visit(map.value()),
            TypeNode::Record(record) => self.visit_record(record),
        }
    }

    fn visit_record(&mut self, record: &RecordType) {
        if !self.tables.contains_key(record.field_names()) {
            self.tables
                .insert(record.field_names().to_vec(), FieldMap::for_record(record));
        }
        // Same names do not imply same field types: always descend.
        for (_, ty) in record.fields() {
            self.visit(ty);
        }
    }

    /// Таблица имён `record`, если запись достижима из корня.
    pub fn fields(&self, record: &RecordType) -> Option<&FieldMap> {
        self.tables.get(record.field_names())
    }

    /// Поиск позиции без учёта регистра; `name` приводится к нижнему регистру.
    pub fn lookup(&self, record: &RecordType, name: &str) -> Option<usize> {
        self.fields(record)?.get(&name.to_lowercase())
    }

    /// Число различных форм записей.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
