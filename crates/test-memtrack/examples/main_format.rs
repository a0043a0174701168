#[memtrack::main(format = "json")]
fn main() {
    let kept = memtrack::malloc(64);
    let dropped = memtrack::calloc(2, 16);
    std::hint::black_box(kept);

    unsafe { memtrack::free(dropped) };
}
