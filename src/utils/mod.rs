use serde::{Deserialize, Serialize};

pub mod coords;
pub mod hash;

// ----------------------------------------------
// Macros
// ----------------------------------------------

// Defines a bitflags struct that displays as its set flag names, e.g. "Road | Civic".
#[macro_export]
macro_rules! bitflags_with_display {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident: $ty:ty { $($flags:tt)* }
    ) => {
        bitflags::bitflags! {
            $(#[$meta])*
            $vis struct $name: $ty { $($flags)* }
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                let mut names = self.iter_names().map(|(name, _)| name);
                let Some(first) = names.next() else {
                    return f.write_str("(empty)");
                };
                f.write_str(first)?;
                names.try_for_each(|name| write!(f, " | {name}"))
            }
        }
    };
}

// ----------------------------------------------
// Size
// ----------------------------------------------

// Integer width & height pair (building footprints, grid dimensions).
#[derive(Copy, Clone, Debug, Default, PartialOrd, Ord, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { width: 0, height: 0 }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[inline]
    pub const fn area(&self) -> i32 {
        self.width * self.height
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}]", self.width, self.height)
    }
}
