use std::fmt;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

// Metadata is a pointer web in the source implementation (tables own
// columns, columns point back to tables and to foreign keys on both sides).
// Here it is an arena of nodes keyed by these stable integer ids; back-edges
// are resolved by arena lookup instead of shared mutable references (§9).
arena_id!(SchemaId);
arena_id!(TableId);
arena_id!(ColumnId);
arena_id!(ForeignKeyId);
arena_id!(CoosysId);
