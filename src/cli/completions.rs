use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    mixer completions bash > ~/.bash_completion.d/mixer\n\n\
                  Generate zsh completions:\n    mixer completions zsh > ~/.zfunc/_mixer\n\n\
                  Generate fish completions:\n    mixer completions fish > ~/.config/fish/completions/mixer.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
