//! Out-of-line storage for aggregates referenced by pointer constants.

use std::fmt;

use kiln_ir::TypeId;

use crate::{ConstError, ConstKind, ConstPayload, ConstPtr, ConstValue};

/// Index of a value stored in a [`ConstArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ConstId(u32);

impl ConstId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ConstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "const#{}", self.0)
    }
}

/// Arena owning every pointee of a pointer constant.
///
/// Lives as long as the compilation context; entries are never removed, so
/// a `ConstId` stays valid for the whole compilation.
#[derive(Clone, Debug, Default)]
pub struct ConstArena {
    values: Vec<ConstValue>,
}

impl ConstArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` values.
    pub fn alloc(&mut self, value: ConstValue) -> ConstId {
        let idx = u32::try_from(self.values.len())
            .unwrap_or_else(|_| panic!("constant arena exceeded u32::MAX entries"));
        self.values.push(value);
        ConstId(idx)
    }

    #[inline]
    pub fn get(&self, id: ConstId) -> &ConstValue {
        &self.values[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: ConstId) -> &mut ConstValue {
        &mut self.values[id.index()]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store `bytes` plus a NUL terminator and return a C-string pointer to
    /// the first byte.
    ///
    /// `array_ty` must be `[bytes.len() + 1]u8`.
    pub fn c_string(&mut self, bytes: &[u8], array_ty: TypeId, ptr_ty: TypeId) -> ConstValue {
        let elems = bytes
            .iter()
            .copied()
            .chain(std::iter::once(0))
            .map(|b| ConstValue::int(TypeId::U8, b))
            .collect();
        let base = self.alloc(ConstValue::array(array_ty, elems));
        ConstValue::pointer(
            ptr_ty,
            ConstPtr {
                base,
                index: 0,
                is_c_str: true,
            },
        )
    }

    /// Elements addressed by `ptr`, from its offset to the end of the base
    /// aggregate.
    pub fn pointee_elems(&self, ptr: ConstPtr) -> Result<&[ConstValue], ConstError> {
        match &self.get(ptr.base).kind {
            ConstKind::Static(ConstPayload::Array(arr)) => {
                let start = usize::try_from(ptr.index).map_err(|_| ConstError::IndexOutOfBounds {
                    index: ptr.index,
                    len: arr.len(),
                })?;
                arr.elems()
                    .get(start..)
                    .ok_or(ConstError::IndexOutOfBounds {
                        index: ptr.index,
                        len: arr.len(),
                    })
            }
            ConstKind::Runtime => Err(ConstError::NotComptime),
            ConstKind::Undef => Err(ConstError::Undefined),
            _ => Err(ConstError::NotAggregate),
        }
    }

    /// Load the element `offset` past `ptr`.
    pub fn load(&self, ptr: ConstPtr, offset: u64) -> Result<ConstValue, ConstError> {
        let elems = self.pointee_elems(ptr)?;
        let len = elems.len() as u64;
        usize::try_from(offset)
            .ok()
            .and_then(|i| elems.get(i))
            .cloned()
            .ok_or(ConstError::IndexOutOfBounds { index: offset, len })
    }

    /// Bytes of a C string up to (not including) the terminator.
    pub fn c_str_bytes(&self, ptr: ConstPtr) -> Result<Vec<u8>, ConstError> {
        let mut out = Vec::new();
        for elem in self.pointee_elems(ptr)? {
            let byte = elem
                .as_int()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or(ConstError::InvalidOperands { op: "c string" })?;
            if byte == 0 {
                break;
            }
            out.push(byte);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests;
