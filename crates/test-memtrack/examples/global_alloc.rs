// Every Rust heap allocation is tracked, without call sites.
fn main() {
    memtrack::register_exit_report();

    let freed = vec![0u8; 1024];
    drop(freed);

    let kept: &'static mut [u8] = Box::leak(vec![7u8; 4096].into_boxed_slice());
    std::hint::black_box(kept);

    let before = memtrack::stats();
    assert!(before.allocation_count >= 2);
    assert!(before.current_allocated_size >= 4096);

    // On-demand reports are ordinary tracked memory owned by the caller
    let text = memtrack::generate_report();
    assert!(text.contains("======= memory report ======="));
    drop(text);
    let snapshot = memtrack::report("global_alloc::main");
    assert!(snapshot.leaks.iter().any(|leak| leak.size == 4096));
    drop(snapshot);

    let after = memtrack::stats();
    assert_eq!(after.double_frees, before.double_frees);
    assert_eq!(after.invalid_frees, before.invalid_frees);
    println!("on-demand reports released cleanly");
}
