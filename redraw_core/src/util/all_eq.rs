//! Props comparison that works for every type: values implementing
//! `PartialEq` are compared by value, everything else (closures, handles
//! without an equality) falls back to comparing addresses. The choice is made
//! at compile time through autoref based method resolution.

pub struct AllEqDispatcher<T>(pub T);

pub trait AllEqViaPartialEq {
    fn all_eq(&self, other: &Self) -> bool;
}
impl<T: PartialEq + ?Sized> AllEqViaPartialEq for &AllEqDispatcher<&T> {
    fn all_eq(&self, other: &Self) -> bool { self.0.eq(other.0) }
}

pub trait AllEqViaPtrEquality {
    fn all_eq(&self, other: &Self) -> bool;
}
impl<T> AllEqViaPtrEquality for AllEqDispatcher<&T> {
    fn all_eq(&self, other: &Self) -> bool { std::ptr::eq(self.0, other.0) }
}

#[macro_export]
macro_rules! all_eq_ {
    ($a:expr, $b:expr) => {{
        #[allow(unused_imports)]
        use $crate::{AllEqViaPartialEq as _, AllEqViaPtrEquality as _};
        (&&$crate::AllEqDispatcher($a)).all_eq(&&$crate::AllEqDispatcher($b))
    }};
}
pub use crate::all_eq_ as all_eq;
