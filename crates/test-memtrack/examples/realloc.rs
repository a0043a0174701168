use std::ptr;

fn main() {
    memtrack::register_exit_report();

    let grown = unsafe {
        let block = memtrack::realloc(ptr::null_mut(), 32);
        memtrack::realloc(block, 4096)
    };
    std::hint::black_box(grown);

    // An address memtrack never handed out
    let mut local = 0u64;
    let unknown = unsafe { memtrack::realloc(ptr::addr_of_mut!(local).cast(), 64) };
    assert!(unknown.is_null());
}
