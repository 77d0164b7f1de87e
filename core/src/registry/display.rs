use super::TypeRegistry;
use crate::st_code::TypeId;
use core::fmt;
use upl_types::Tag;

/// Nesting deeper than this is elided. Only reachable when an entry refers to
/// itself or to a later entry.
const MAX_DEPTH: usize = 64;

/// Types written before the rest of the output is elided. Shared operands are
/// expanded at every use, so output would otherwise grow exponentially.
const MAX_NODES: usize = 256;

/// Formats a registered type, e.g. `map<string, vector<const int>>`.
pub struct TypeDisplay<'r> {
    registry: &'r TypeRegistry,
    id: TypeId,
}

impl<'r> TypeDisplay<'r> {
    pub fn new(registry: &'r TypeRegistry, id: TypeId) -> Self {
        Self { registry, id }
    }

    fn write(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: TypeId,
        depth: usize,
        budget: &mut usize,
    ) -> fmt::Result {
        if depth > MAX_DEPTH || *budget == 0 {
            return f.write_str("...");
        }
        *budget -= 1;
        let Ok(view) = self.registry.unpack(id) else {
            return write!(f, "<invalid {}>", id);
        };
        if view.is_const {
            f.write_str("const ")?;
        }

        let depth = depth + 1;
        let operand = |slot: Option<TypeId>| slot.unwrap_or(TypeId::INVALID);
        match view.tag {
            Tag::Nil
            | Tag::Bool
            | Tag::Byte
            | Tag::Char
            | Tag::Int
            | Tag::Real
            | Tag::String
            | Tag::Any => f.write_str(view.tag.name()),
            Tag::Array => {
                f.write_str("[")?;
                self.write(f, operand(view.type1), depth, budget)?;
                write!(f, "; {}]", view.size)
            }
            Tag::Vector => {
                f.write_str("vector<")?;
                self.write(f, operand(view.type1), depth, budget)?;
                f.write_str(">")
            }
            Tag::Map => {
                f.write_str("map<")?;
                self.write(f, operand(view.type1), depth, budget)?;
                f.write_str(", ")?;
                self.write(f, operand(view.type2), depth, budget)?;
                f.write_str(">")
            }
            Tag::Tuple => {
                f.write_str("(")?;
                self.write_list(f, &view.type_list, ", ", depth, budget)?;
                f.write_str(")")
            }
            Tag::Package => {
                f.write_str("package {")?;
                self.write_list(f, &view.type_list, ", ", depth, budget)?;
                f.write_str("}")
            }
            Tag::Variant => {
                f.write_str("variant<")?;
                self.write_list(f, &view.type_list, " | ", depth, budget)?;
                f.write_str(">")
            }
            Tag::Function => {
                f.write_str("func(")?;
                self.write_list(f, &view.type_list, ", ", depth, budget)?;
                f.write_str(") -> ")?;
                self.write(f, operand(view.type1), depth, budget)
            }
        }
    }

    fn write_list(
        &self,
        f: &mut fmt::Formatter<'_>,
        ids: &[TypeId],
        separator: &str,
        depth: usize,
        budget: &mut usize,
    ) -> fmt::Result {
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            if *budget == 0 {
                return f.write_str("...");
            }
            self.write(f, id, depth, budget)?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut budget = MAX_NODES;
        self.write(f, self.id, 0, &mut budget)
    }
}
