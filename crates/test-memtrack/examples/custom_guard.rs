use memtrack::{Format, GuardBuilder};

fn work() {
    let scratch = memtrack::malloc(256);
    let _ = memtrack::malloc(32);
    unsafe { memtrack::free(scratch) };
}

fn main() {
    // The guard reports first, the exit hook then stays silent
    memtrack::register_exit_report();

    {
        let _guard = GuardBuilder::new("custom_guard::work")
            .format(Format::Table)
            .build();
        work();
    }

    println!("final report emitted: {}", memtrack::final_report_emitted());
}
