/*
Copyright 2026 Ian Moffett

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

/// Handle to a symbol table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymKind {
    Label,
}

/// A program symbol. `vpc` is frozen when the label is defined on the
/// first pass and never mutated afterwards.
#[derive(Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymKind,
    pub id: SymId,
    pub vpc: u64,
}

/// Insertion-ordered symbol table with linear lookup. Duplicate names
/// are not rejected; `by_name` returns the first definition.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new symbol and append it to the table.
    pub fn new_symbol(&mut self, name: &str, kind: SymKind) -> SymId {
        let id = SymId(self.entries.len());
        self.entries.push(Symbol {
            name: name.to_string(),
            kind,
            id,
            vpc: 0,
        });
        id
    }

    pub fn by_name(&self, name: &str) -> Option<&Symbol> {
        self.entries.iter().find(|sym| sym.name == name)
    }

    pub fn by_id(&self, id: SymId) -> &Symbol {
        &self.entries[id.0]
    }

    pub fn by_id_mut(&mut self, id: SymId) -> &mut Symbol {
        &mut self.entries[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let mut table = SymbolTable::new();
        let first = table.new_symbol("start", SymKind::Label);
        let second = table.new_symbol("loop", SymKind::Label);
        assert_ne!(first, second);
        assert_eq!(table.by_id(first).name, "start");
        assert_eq!(table.by_id(second).name, "loop");
    }

    #[test]
    fn by_name_finds_first_definition() {
        let mut table = SymbolTable::new();
        let first = table.new_symbol("start", SymKind::Label);
        table.by_id_mut(first).vpc = 0x10;
        table.new_symbol("start", SymKind::Label);
        assert_eq!(table.by_name("start").unwrap().vpc, 0x10);
    }

    #[test]
    fn missing_name_is_none() {
        let table = SymbolTable::new();
        assert!(table.by_name("nowhere").is_none());
    }
}
