use colored::Colorize;

const BANNER: &str = r" ,-----. ,---.   ,-----.,--------.     ,-----.,--.    ,-----. ,--. ,--.,------.
'  .--./'   .-' '  .--./'--.  .--'    '  .--./|  |   '  .-.  '|  | |  ||  .-.  \
|  |    `.  `-. |  |       |  |       |  |    |  |   |  | |  ||  | |  ||  |  \  :
'  '--'\.-'    |'  '--'\   |  |       '  '--'\|  '--.'  '-'  ''  '-'  '|  '--'  /
 `-----'`-----'  `-----'   `--'        `-----'`-----' `-----'  `-----' `-------'";

/// Print the CSCT CLOUD header
pub fn print_header() {
    // Windows consoles only render ANSI colors once virtual terminal
    // processing is switched on
    #[cfg(windows)]
    let _ = colored::control::set_virtual_terminal(true);

    println!("{}", BANNER.bright_blue().bold());
    println!();
}
