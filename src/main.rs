fn main() -> anyhow::Result<()> {
    daytrack_lib::run()
}
