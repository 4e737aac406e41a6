use crate::compute::ledger::{CacheKey, EvalState, KeyId, Ledger};
use crate::entity::EntityGraph;
use crate::store::VariableRegistry;
use std::collections::HashMap;
use std::fmt::Write;

/// Renders the tree of keys an evaluated key was computed from, with the
/// cached value of each. Keys already printed higher up are referenced by
/// level instead of being expanded again.
pub fn format_trace(registry: &VariableRegistry, entities: &EntityGraph, ledger: &Ledger, target: CacheKey) -> String {
    let mut tracer = Tracer {
        registry,
        entities,
        ledger,
        visited_at_level: HashMap::new(),
        output: String::new(),
    };

    let name = tracer.variable_name(&target);
    match ledger.lookup(&target) {
        Some(id) => {
            let _ = writeln!(tracer.output, "AUDIT TRACE for '{}' ({}, {}):", name, tracer.entity_label(&target), target.period);
            let _ = writeln!(tracer.output, "--------------------------------------------------");
            tracer.trace_key(id, 1, "");
        }
        None => {
            let _ = writeln!(tracer.output, "Error: '{}' was not evaluated for {} at {}", name, tracer.entity_label(&target), target.period);
        }
    }
    tracer.output
}

struct Tracer<'a> {
    registry: &'a VariableRegistry,
    entities: &'a EntityGraph,
    ledger: &'a Ledger,
    visited_at_level: HashMap<KeyId, usize>,
    output: String,
}

impl<'a> Tracer<'a> {
    fn trace_key(&mut self, id: KeyId, level: usize, prefix: &str) {
        if let Some(&first_seen) = self.visited_at_level.get(&id) {
            let _ = writeln!(self.output, "{}-> (Ref to L{})", prefix, first_seen);
            return;
        }
        self.visited_at_level.insert(id, level);

        let Some(key) = self.ledger.key(id).copied() else {
            let _ = writeln!(self.output, "{}[L{}] <unknown key #{}>", prefix, level, id.0);
            return;
        };
        let is_input = self.registry.get(key.variable).map_or(true, |d| d.is_input());
        let line_header = format!(
            "[L{}] {}<{}>@{}{}",
            level,
            self.variable_name(&key),
            self.entity_label(&key),
            key.period,
            self.format_value(id)
        );

        let dependencies = self.ledger.dependencies().dependencies_of(id);
        if dependencies.is_empty() && is_input {
            let _ = writeln!(self.output, "{}{} -> Input", prefix, line_header);
            return;
        }
        let _ = writeln!(self.output, "{}{}", prefix, line_header);
        self.recurse_children(prefix, &dependencies, level);
    }

    fn recurse_children(&mut self, prefix: &str, children: &[KeyId], level: usize) {
        let stem = self.build_child_stem(prefix);
        for (i, &child) in children.iter().enumerate() {
            let connector = if i == children.len() - 1 { "`--" } else { "|--" };
            let full_prefix = format!("{}{}", stem, connector);
            self.trace_key(child, level + 1, &full_prefix);
        }
    }

    fn variable_name(&self, key: &CacheKey) -> String {
        self.registry
            .get(key.variable)
            .map_or_else(|| format!("#{}", key.variable.0), |d| d.name.clone())
    }

    fn entity_label(&self, key: &CacheKey) -> String {
        match self.entities.id_of(key.entity) {
            Ok(id) => format!("{}:{}", key.entity.kind.key(), id),
            Err(_) => key.entity.to_string(),
        }
    }

    fn format_value(&self, id: KeyId) -> String {
        match self.ledger.state(id) {
            EvalState::Computed(v) => format!("[{}]", v),
            EvalState::Failed(e) => format!("[Err: {}]", e),
            EvalState::InProgress => "[...]".to_string(),
            EvalState::NotRequested => "[?]".to_string(),
        }
    }

    fn build_child_stem(&self, current_prefix: &str) -> String {
        current_prefix.replace("`--", "   ").replace("|--", "|  ")
    }
}
