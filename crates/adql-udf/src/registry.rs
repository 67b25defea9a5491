use adql_helpers::IndexMap;

use crate::signature::FunctionDef;

/// A collection of declared UDF signatures (§3 C4), keyed by the
/// `(lowercased name, signature bitstring)` order so overloads of the same
/// name sort together and an exact-bits duplicate is rejected at insertion.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<(String, Vec<u8>), FunctionDef>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `def`, returning the previous definition if one with the
    /// exact same name and signature bits was already present.
    pub fn insert(&mut self, def: FunctionDef) -> Option<FunctionDef> {
        self.functions.insert(def.order_key(), def)
    }

    /// All overloads declared under `name`, case-insensitively, ordered by
    /// signature bits (most to least specific is a translator-level concern;
    /// this just preserves declaration order within the name group).
    pub fn overloads(&self, name: &str) -> Vec<&FunctionDef> {
        let lowered = name.to_lowercase();
        self.functions
            .iter()
            .filter(|((n, _), _)| n == &lowered)
            .map(|(_, def)| def)
            .collect()
    }

    /// Looks up the unique overload matching `name` and the given call-site
    /// argument signature bits, if any.
    pub fn resolve(&self, name: &str, arg_bits: &[u8]) -> Option<&FunctionDef> {
        let lowered = name.to_lowercase();
        self.functions.get(&(lowered, arg_bits.to_vec()))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_finds_exact_signature_match() {
        let mut reg = FunctionRegistry::new();
        reg.insert(crate::signature::FunctionDef::parse("toto(a int) -> int").unwrap());
        let def = reg.resolve("TOTO", &[2]).unwrap();
        assert_eq!(def.name, "toto");
    }

    #[test]
    fn overloads_groups_by_case_insensitive_name() {
        let mut reg = FunctionRegistry::new();
        reg.insert(crate::signature::FunctionDef::parse("f(a int)").unwrap());
        reg.insert(crate::signature::FunctionDef::parse("f(a varchar)").unwrap());
        assert_eq!(reg.overloads("F").len(), 2);
    }
}
