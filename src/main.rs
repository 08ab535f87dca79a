fn main() -> loadprobe::error::AppResult<()> {
    loadprobe::run()
}
