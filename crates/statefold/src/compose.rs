//! Right-to-left function composition

use std::rc::Rc;

/// A shareable single-argument function from `T` to `T`
pub type Composable<T> = Rc<dyn Fn(T) -> T>;

/// Compose functions from right to left.
///
/// `compose([f, g, h])` behaves like `|x| f(g(h(x)))`. Nothing is invoked
/// here; the functions are only combined. With no functions the result is
/// the identity, with one function that same function is handed back.
pub fn compose<T: 'static>(fns: impl IntoIterator<Item = Composable<T>>) -> Composable<T> {
    fns.into_iter()
        .reduce(|outer, inner| -> Composable<T> { Rc::new(move |arg: T| outer(inner(arg))) })
        .unwrap_or_else(|| -> Composable<T> { Rc::new(|arg: T| arg) })
}

/// `compose!(f, g, h)` wraps each closure and composes them right to left
#[macro_export]
macro_rules! compose {
    ($($f:expr),* $(,)?) => {
        $crate::compose::compose(::std::vec![
            $(::std::rc::Rc::new($f) as $crate::compose::Composable<_>),*
        ])
    };
}
