use std::fmt;
use std::marker::PhantomData;
use std::ops;

use super::Register;

/// The closed set of register names an architecture declares.
///
/// Implement this with [`register_set!`](crate::register_set) rather than by hand; the macro keeps
/// `ALL` and `index` consistent with the enum's declaration order.
pub trait RegisterName: Copy + Eq + fmt::Debug + fmt::Display + 'static {
    const ALL: &'static [Self];

    fn index(self) -> usize;
    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|reg| reg.name() == name)
    }

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[macro_export]
macro_rules! register_set {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($reg:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $($reg,)+
        }

        impl $crate::register::RegisterName for $name {
            const ALL: &'static [Self] = &[$($name::$reg,)+];

            fn index(self) -> usize {
                self as usize
            }

            fn name(self) -> &'static str {
                match self {
                    $($name::$reg => stringify!($reg),)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::register::RegisterName::name(*self))
            }
        }
    };
}

/// Register state of a core: exactly one [`Register`] per name in `R::ALL`, in declaration
/// order. Names are never added or removed after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterFile<R: RegisterName> {
    registers: Vec<Register>,
    names: PhantomData<R>,
}

impl<R: RegisterName> Default for RegisterFile<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RegisterName> RegisterFile<R> {
    pub fn new() -> Self {
        Self {
            registers: vec![Register::default(); R::ALL.len()],
            names: PhantomData,
        }
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Register> {
        R::from_name(name).map(|reg| &self[reg])
    }

    pub fn iter(&self) -> impl Iterator<Item = (R, &Register)> + '_ {
        R::ALL.iter().copied().zip(self.registers.iter())
    }

    /// Overwrites the listed registers and leaves every other register untouched.
    pub fn set_state(&mut self, values: impl IntoIterator<Item = (R, u32)>) {
        for (reg, value) in values {
            self[reg].write(value);
        }
    }

    /// Clears every register, then applies the given reset values.
    pub fn reset(&mut self, values: impl IntoIterator<Item = (R, u32)>) {
        self.registers.fill(Register::default());
        self.set_state(values);
    }
}

impl<R: RegisterName> ops::Index<R> for RegisterFile<R> {
    type Output = Register;

    fn index(&self, reg: R) -> &Self::Output {
        &self.registers[reg.index()]
    }
}

impl<R: RegisterName> ops::IndexMut<R> for RegisterFile<R> {
    fn index_mut(&mut self, reg: R) -> &mut Self::Output {
        &mut self.registers[reg.index()]
    }
}

impl<R: RegisterName> fmt::Debug for RegisterFile<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<R: RegisterName> fmt::Display for RegisterFile<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (reg, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", reg, value)?;
            first = false;
        }
        Ok(())
    }
}
