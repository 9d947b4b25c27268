//! Stream flag registry.
//!
//! Every property occupies a two-bit field: `IS` (bit 0 of the field) means
//! known true, `NOT` (bit 1) means known false. A stage's op flags mention only
//! the properties it sets or clears; an untouched field (`00`) preserves what
//! the upstream stages established. Combined flags start from
//! [`StreamFlags::INITIAL`], where every field is `11` (unknown).
//!
//! SHORT_CIRCUIT has no `NOT` form, so once any stage sets it every downstream
//! combination keeps it.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Characteristics reported by a traversal cursor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Characteristics: u32 {
        const ORDERED = 1 << 0;
        const DISTINCT = 1 << 1;
        const SORTED = 1 << 2;
        const SIZED = 1 << 3;
        const SUBSIZED = 1 << 4;
        const IMMUTABLE = 1 << 5;
        const CONCURRENT = 1 << 6;
    }
}

/// Properties tracked by [`StreamFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Distinct,
    Sorted,
    Ordered,
    Sized,
    ShortCircuit,
}

impl Property {
    pub const ALL: [Property; 5] = [
        Property::Distinct,
        Property::Sorted,
        Property::Ordered,
        Property::Sized,
        Property::ShortCircuit,
    ];

    const fn shift(self) -> u32 {
        match self {
            Property::Distinct => 0,
            Property::Sorted => 2,
            Property::Ordered => 4,
            Property::Sized => 6,
            Property::ShortCircuit => 8,
        }
    }

    const fn is_bit(self) -> u32 {
        1 << self.shift()
    }

    const fn not_bit(self) -> u32 {
        2 << self.shift()
    }

    const fn field(self) -> u32 {
        3 << self.shift()
    }
}

const IS_MASK: u32 = 0b01_0101_0101;
// SHORT_CIRCUIT's clear bit is reserved and never stored.
const NOT_MASK: u32 = 0b00_1010_1010;
const SHORT_CIRCUIT_NOT: u32 = 2 << 8;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamFlags(u32);

impl StreamFlags {
    /// Op flags that change nothing.
    pub const EMPTY: StreamFlags = StreamFlags(0);
    /// Combined flags before any stage contributed: every property unknown.
    pub const INITIAL: StreamFlags = StreamFlags(IS_MASK | NOT_MASK | SHORT_CIRCUIT_NOT);

    pub const IS_DISTINCT: StreamFlags = StreamFlags(Property::Distinct.is_bit());
    pub const NOT_DISTINCT: StreamFlags = StreamFlags(Property::Distinct.not_bit());
    pub const IS_SORTED: StreamFlags = StreamFlags(Property::Sorted.is_bit());
    pub const NOT_SORTED: StreamFlags = StreamFlags(Property::Sorted.not_bit());
    pub const IS_ORDERED: StreamFlags = StreamFlags(Property::Ordered.is_bit());
    pub const NOT_ORDERED: StreamFlags = StreamFlags(Property::Ordered.not_bit());
    pub const IS_SIZED: StreamFlags = StreamFlags(Property::Sized.is_bit());
    pub const NOT_SIZED: StreamFlags = StreamFlags(Property::Sized.not_bit());
    pub const IS_SHORT_CIRCUIT: StreamFlags = StreamFlags(Property::ShortCircuit.is_bit());

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Union of two op flag sets. A property named by both keeps both bits,
    /// which reads as unknown; callers should not mix IS and NOT of one property.
    pub const fn union(self, other: StreamFlags) -> StreamFlags {
        StreamFlags(self.0 | other.0)
    }

    /// Mark `p` known true.
    pub const fn set(self, p: Property) -> StreamFlags {
        StreamFlags((self.0 & !p.field()) | p.is_bit())
    }

    /// Mark `p` known false. SHORT_CIRCUIT cannot be cleared.
    pub const fn clear(self, p: Property) -> StreamFlags {
        match p {
            Property::ShortCircuit => self,
            _ => StreamFlags((self.0 & !p.field()) | p.not_bit()),
        }
    }

    /// Fold this stage's op flags over the inherited combined flags.
    pub fn combine(self, inherited: StreamFlags) -> StreamFlags {
        let own = self.0 & !SHORT_CIRCUIT_NOT;
        let touched = (own & IS_MASK) | ((own & NOT_MASK) >> 1);
        let fields = touched | (touched << 1);
        StreamFlags((inherited.0 & !fields) | own)
    }

    pub const fn is_known(self, p: Property) -> bool {
        self.0 & p.field() == p.is_bit()
    }

    pub const fn is_known_false(self, p: Property) -> bool {
        self.0 & p.field() == p.not_bit()
    }

    pub const fn is_unknown(self, p: Property) -> bool {
        !self.is_known(p) && !self.is_known_false(p)
    }

    /// True when the stage flags say anything about `p`.
    pub const fn mentions(self, p: Property) -> bool {
        self.0 & p.field() != 0
    }

    /// Source flags from cursor characteristics. A source states its
    /// properties definitively, so a missing characteristic becomes known false.
    pub fn from_characteristics(c: Characteristics) -> StreamFlags {
        let mut flags = StreamFlags::EMPTY;
        for (p, bit) in [
            (Property::Distinct, Characteristics::DISTINCT),
            (Property::Sorted, Characteristics::SORTED),
            (Property::Ordered, Characteristics::ORDERED),
            (Property::Sized, Characteristics::SIZED),
        ] {
            flags = if c.contains(bit) {
                flags.set(p)
            } else {
                flags.clear(p)
            };
        }
        flags
    }

    /// Characteristics implied by the properties known true.
    pub fn to_characteristics(self) -> Characteristics {
        let mut c = Characteristics::empty();
        if self.is_known(Property::Distinct) {
            c |= Characteristics::DISTINCT;
        }
        if self.is_known(Property::Sorted) {
            c |= Characteristics::SORTED;
        }
        if self.is_known(Property::Ordered) {
            c |= Characteristics::ORDERED;
        }
        if self.is_known(Property::Sized) {
            c |= Characteristics::SIZED;
        }
        c
    }
}

impl fmt::Debug for StreamFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for p in Property::ALL {
            if self.is_known(p) {
                list.entry(&format_args!("IS_{:?}", p));
            } else if self.is_known_false(p) {
                list.entry(&format_args!("NOT_{:?}", p));
            }
        }
        list.finish()
    }
}
