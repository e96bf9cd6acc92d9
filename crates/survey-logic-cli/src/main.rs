fn main() -> anyhow::Result<()> {
    survey_logic_cli::cli::main()
}
