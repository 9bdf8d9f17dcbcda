use fastcast_lib::app::run;
use io_impl::RealIo;

fn main() -> std::io::Result<()> {
    run(&RealIo())
}
