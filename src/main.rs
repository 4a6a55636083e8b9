use voltx::core::providers::ProviderResolutionError;

fn main() {
    if let Err(err) = voltx::cli::main() {
        if let Some(resolution) = err.downcast_ref::<ProviderResolutionError>() {
            eprintln!("❌ {resolution}");
            if !resolution.quick_fixes().is_empty() {
                eprintln!();
                eprintln!("Quick fixes:");
                for fix in resolution.quick_fixes() {
                    eprintln!("  {fix}");
                }
            }
            std::process::exit(resolution.exit_code());
        }
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}
