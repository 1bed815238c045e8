//! Dispatch tables.
//!
//! A class's table starts as a copy of its base's. Each dispatched method
//! the class declares either replaces the entry with the same signature
//! hash or appends a new slot, so a method keeps its slot index along the
//! whole inheritance chain.

use rustc_hash::FxHashMap;

use portc_core::{MethodId, SignatureHash};
use portc_registry::Program;

/// One entry of a dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSlot {
    pub slot: u32,
    pub method: MethodId,
}

/// The dispatch table of one class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchTable {
    /// Implementation per slot.
    methods: Vec<MethodId>,
    /// Signature hash to slot index.
    index: FxHashMap<SignatureHash, u32>,
    /// Number of slots inherited from the base class.
    inherited: u32,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn method_at(&self, slot: u32) -> Option<MethodId> {
        self.methods.get(slot as usize).copied()
    }

    pub fn slot_by_signature(&self, signature: SignatureHash) -> Option<u32> {
        self.index.get(&signature).copied()
    }

    /// Slots in index order.
    pub fn slots(&self) -> impl Iterator<Item = DispatchSlot> + '_ {
        self.methods.iter().enumerate().map(|(slot, &method)| DispatchSlot {
            slot: slot as u32,
            method,
        })
    }

    /// Slots the class adds on top of its base's table.
    pub fn introduced(&self) -> impl Iterator<Item = DispatchSlot> + '_ {
        self.slots().skip(self.inherited as usize)
    }

    /// Put `method` in the slot for `signature`, adding one if needed.
    fn set(&mut self, signature: SignatureHash, method: MethodId) -> u32 {
        match self.index.get(&signature) {
            Some(&slot) => {
                self.methods[slot as usize] = method;
                slot
            }
            None => {
                let slot = self.methods.len() as u32;
                self.methods.push(method);
                self.index.insert(signature, slot);
                slot
            }
        }
    }
}

/// Tables for every class (indexed by `ClassId`) and the slot of every
/// dispatched method.
pub(crate) fn build_tables(program: &Program) -> (Vec<DispatchTable>, FxHashMap<MethodId, u32>) {
    let mut tables = vec![DispatchTable::new(); program.classes().len()];
    let mut slots = FxHashMap::default();

    for class in program.classes_by_depth() {
        let entry = program.class(class);
        let mut table = match entry.base {
            Some(base) => tables[base.index()].clone(),
            None => DispatchTable::new(),
        };
        table.inherited = table.len() as u32;

        for &method in &entry.methods {
            let m = program.method(method);
            if !m.virtuality.is_dispatched() {
                continue;
            }
            let slot = table.set(m.signature, method);
            slots.insert(method, slot);
        }
        tracing::trace!(
            class = %entry.name,
            slots = table.len(),
            introduced = table.len() as u32 - table.inherited,
            "dispatch table"
        );
        tables[class.index()] = table;
    }
    (tables, slots)
}

