mod memory_store;
mod role;
