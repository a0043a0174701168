// One block freed, one left behind.
fn main() {
    memtrack::register_exit_report();

    let first = memtrack::malloc(100);
    let second = memtrack::malloc(200);
    std::hint::black_box(second);

    unsafe { memtrack::free(first) };
}
