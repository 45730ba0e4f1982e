//! Bit sets attached to types.

use bitflags::bitflags;
use kiln_ir::FnDeclFlags;

bitflags! {
    /// Type-relevant function modifiers.
    ///
    /// Part of the structural key of a function type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FnFlags: u8 {
        const VAR_ARGS = 1 << 0;
        const INLINE = 1 << 1;
        const EXTERN = 1 << 2;
        const NAKED = 1 << 3;
    }
}

impl FnFlags {
    /// Keep only the declaration modifiers that affect the function type.
    pub fn from_decl(flags: FnDeclFlags) -> Self {
        let mut out = FnFlags::empty();
        out.set(FnFlags::VAR_ARGS, flags.contains(FnDeclFlags::VAR_ARGS));
        out.set(FnFlags::INLINE, flags.contains(FnDeclFlags::INLINE));
        out.set(FnFlags::EXTERN, flags.contains(FnDeclFlags::EXTERN));
        out.set(FnFlags::NAKED, flags.contains(FnDeclFlags::NAKED));
        out
    }
}

bitflags! {
    /// Pre-computed type properties for O(1) queries.
    ///
    /// Computed at interning time; nominal types update theirs once when
    /// their body is completed.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u16 {
        /// Contains the invalid type somewhere.
        const HAS_INVALID = 1 << 0;
        /// Values only exist at compile time (`type`, `comptime_int`, ...).
        const COMPTIME_ONLY = 1 << 1;
        /// Occupies no storage.
        const ZERO_SIZED = 1 << 2;
        const IS_INT = 1 << 3;
        const IS_FLOAT = 1 << 4;
        /// Identity is its declaration, not its structure.
        const IS_NOMINAL = 1 << 5;
    }
}

impl TypeFlags {
    /// Flags inherited by a compound type from its children.
    pub const PROPAGATE_MASK: Self =
        Self::from_bits_truncate(Self::HAS_INVALID.bits() | Self::COMPTIME_ONLY.bits());

    #[inline]
    pub const fn propagated(self) -> Self {
        self.intersection(Self::PROPAGATE_MASK)
    }
}
