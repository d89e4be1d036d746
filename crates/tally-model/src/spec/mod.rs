mod counter;
pub use counter::CounterSpec;
