//! Scoped render targets
//!
//! Every export draws into a surface owned by a [`RenderTarget`]. The target
//! is released when it goes out of scope, whether the export finished or
//! bailed out half way with `?`.

/// Owns an in-memory drawing surface for the duration of one export
pub struct RenderTarget<S> {
    label: &'static str,
    surface: S,
}

impl<S> RenderTarget<S> {
    pub fn acquire(label: &'static str, surface: S) -> Self {
        log::trace!("Acquired {} render target", label);
        Self { label, surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S> Drop for RenderTarget<S> {
    fn drop(&mut self) {
        log::trace!("Released {} render target", self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Surface(Rc<Cell<bool>>);

    impl Drop for Surface {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    fn encode(_surface: &Surface) -> Result<Vec<u8>, String> {
        Err("encoder failed".to_string())
    }

    fn failing_export(released: Rc<Cell<bool>>) -> Result<Vec<u8>, String> {
        let target = RenderTarget::acquire("scratch", Surface(released));
        assert!(!target.surface().0.get());
        let bytes = encode(target.surface())?;
        Ok(bytes)
    }

    #[test]
    fn test_released_on_error_path() {
        let released = Rc::new(Cell::new(false));
        assert!(failing_export(released.clone()).is_err());
        assert!(released.get());
    }

    #[test]
    fn test_released_at_scope_end() {
        let released = Rc::new(Cell::new(false));
        {
            let mut target = RenderTarget::acquire("scratch", Surface(released.clone()));
            let _ = target.surface_mut();
            assert!(!released.get());
        }
        assert!(released.get());
    }
}
