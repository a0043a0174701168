fn main() {
    memtrack::register_exit_report();

    let block = memtrack::malloc(50);
    unsafe {
        memtrack::free(block);
        memtrack::free(block);
    }
}
