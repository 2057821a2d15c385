//! Interned string keys for blackboard variables.
//!
//! Every distinct key string is stored exactly once for the lifetime of the
//! process, so two [`Symbol`]s are equal if and only if they point at the
//! same backing string. Equality and hashing are on the address, never the
//! characters, which keeps blackboard lookups cheap even for long keys.

use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Mutex;

use once_cell::sync::Lazy;

static INTERNER: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// An interned string with O(1) equality.
#[derive(Clone, Copy, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Symbol {
    s: &'static str,
}

impl Symbol {
    /// Retrieves the string behind the symbol.
    pub fn as_str(self) -> &'static str {
        self.s
    }

    fn addr(self) -> usize {
        self.s.as_ptr() as usize
    }
}

impl<S: AsRef<str>> From<S> for Symbol {
    fn from(s: S) -> Symbol {
        let s = s.as_ref();
        let mut interner = INTERNER.lock().expect("symbol interner poisoned");
        let interned = match interner.get(s) {
            Some(interned) => interned,
            None => {
                let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
                interner.insert(leaked);
                leaked
            }
        };
        Symbol { s: interned }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<S: AsRef<str>> PartialEq<S> for Symbol {
    fn eq(&self, other: &S) -> bool {
        self.s == other.as_ref()
    }
}

impl Deref for Symbol {
    type Target = str;
    fn deref(&self) -> &str {
        self.s
    }
}

impl Debug for Symbol {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        Debug::fmt(self.s, fmt)
    }
}

impl Display for Symbol {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        fmt.write_str(self.s)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Symbol, D::Error> {
        use serde::Deserialize;
        String::deserialize(de).map(Symbol::from)
    }
}
