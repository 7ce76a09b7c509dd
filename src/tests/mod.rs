// src/tests/mod.rs - Centralized unit tests for fixstep

#[cfg(test)]
pub mod config_tests;




#[cfg(test)]
pub mod test_utils {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    pub fn init_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    pub fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    // Shared invocation counter for step and error callbacks
    pub fn counter() -> Rc<Cell<u32>> {
        Rc::new(Cell::new(0))
    }

    pub fn counting_step(count: &Rc<Cell<u32>>) -> impl FnMut(Duration) + 'static {
        let count = Rc::clone(count);
        move |_| count.set(count.get() + 1)
    }
}
