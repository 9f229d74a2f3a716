/*
Copyright 2026 The mipsdisasm Authors

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

//! The symbol table: a flat, alias-tolerant list of labels keyed by
//! virtual address, sorted once (vaddr, then global, then name) before
//! pass two reads it.

const INITIAL_LABEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub vaddr: u32,
    pub global: bool,
}

#[derive(Debug, Default)]
pub struct LabelTable {
    labels: Vec<Label>,
    sorted: bool,
}

impl LabelTable {
    pub fn new() -> Self {
        Self {
            labels: Vec::with_capacity(INITIAL_LABEL_CAPACITY),
            sorted: false,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Find a label at the given address. Before `sort()` this is a linear
    /// scan in insertion order; the result is still correct, just not
    /// canonically ordered among aliases at the same address.
    pub fn find(&self, vaddr: u32) -> Option<usize> {
        self.labels.iter().position(|l| l.vaddr == vaddr)
    }

    /// Append a label unconditionally. Callers are responsible for
    /// checking `find()` first if they want to avoid duplicates; aliases
    /// (same vaddr, different name/global) are intentionally tolerated.
    pub fn add(&mut self, name: impl Into<String>, vaddr: u32, global: bool) {
        log::trace!("label_add vaddr=0x{vaddr:08X} global={global}");
        self.labels.push(Label {
            name: name.into(),
            vaddr,
            global,
        });
        self.sorted = false;
    }

    pub fn get(&self, index: usize) -> &Label {
        &self.labels[index]
    }

    /// Apply the canonical order: ascending by vaddr, ties broken by
    /// global (false < true), further ties by name. Must be called at
    /// least once before pass two; `DisassemblyState::pass_two` does this
    /// automatically if labels changed since the last sort.
    pub fn sort(&mut self) {
        self.labels
            .sort_by(|a, b| (a.vaddr, a.global, &a.name).cmp(&(b.vaddr, b.global, &b.name)));
        self.sorted = true;
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_find_before_sort() {
        let mut table = LabelTable::new();
        table.add("func_80001000", 0x8000_1000, true);
        assert_eq!(table.find(0x8000_1000), Some(0));
        assert_eq!(table.find(0x8000_2000), None);
    }

    #[test]
    fn sort_orders_by_vaddr_then_global_then_name() {
        let mut table = LabelTable::new();
        table.add("func_80001000", 0x8000_1000, true);
        table.add(".L80000000", 0x8000_0000, false);
        table.add("D_80000000", 0x8000_0000, true);
        table.add("@L80000000", 0x8000_0000, false);
        table.sort();

        let ordered: Vec<&str> = table.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(ordered, vec!["@L80000000", ".L80000000", "D_80000000", "func_80001000"]);
    }

    #[test]
    fn aliases_at_the_same_address_are_tolerated() {
        let mut table = LabelTable::new();
        table.add("func_80001000", 0x8000_1000, true);
        table.add("alt_name", 0x8000_1000, true);
        assert_eq!(table.len(), 2);
    }
}
