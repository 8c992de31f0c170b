mod import_tests;
mod property_tests;

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use jsonlang::loader::{MemoryLoader, UnitLoader};
use jsonlang::Runtime;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Output sink that stays readable after being handed to a runtime.
#[derive(Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn setup_runtime_with(loader: impl UnitLoader + 'static) -> (Runtime, SharedOutput) {
    let output = SharedOutput::default();
    let runtime = Runtime::new(Box::new(loader)).with_output(Box::new(output.clone()));
    (runtime, output)
}

pub fn setup_runtime() -> (Runtime, SharedOutput) {
    setup_runtime_with(MemoryLoader::default())
}
