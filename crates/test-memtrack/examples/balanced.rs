fn main() {
    memtrack::register_exit_report();

    let blocks: Vec<_> = (1..=16).map(|i| memtrack::malloc(i * 8)).collect();
    let zeroed = memtrack::calloc(4, 32);

    for block in blocks {
        unsafe { memtrack::free(block) };
    }
    unsafe { memtrack::free(zeroed) };
}
