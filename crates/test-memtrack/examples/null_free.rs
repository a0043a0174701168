fn main() {
    memtrack::register_exit_report();

    unsafe { memtrack::free(std::ptr::null_mut()) };
}
