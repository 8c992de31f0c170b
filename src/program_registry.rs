use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::ast::Program;

/// Loaded program units keyed by name. Registering a name again replaces the unit.
#[derive(Debug, Clone, Default)]
pub struct ProgramRegistry {
    programs: HashMap<String, Rc<Program>>,
}

impl ProgramRegistry {
    pub fn register(&mut self, program: Program) -> Option<Rc<Program>> {
        debug!(program = %program.name, "register program");
        self.programs
            .insert(program.name.clone(), Rc::new(program))
    }

    pub fn get(&self, name: &str) -> Option<Rc<Program>> {
        self.programs.get(name).cloned()
    }

    pub fn list(&self) -> Vec<Rc<Program>> {
        let mut programs: Vec<_> = self.programs.values().cloned().collect();
        programs.sort_by(|a, b| a.name.cmp(&b.name));
        programs
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
