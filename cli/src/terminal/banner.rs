use colored::*;

use crate::terminal::print;

const BANNER_0: &str = r#"
          ____  _       ____
         |  _ \(_) __ _/ ___|  ___ __ _ _ __
         | |_) | |/ _` \___ \ / __/ _` | '_ \
         |  _ <| | (_| |___) | (_| (_| | | | |
         |_| \_\_|\__, |____/ \___\__,_|_| |_|
                  |___/
"#;

const BANNER_1: &str = r#"
       ┌──────────────────────────────────────────┐
       │  ▛▀▖▗       ▞▀▖                          │
       │  ▙▄▘▄ ▞▀▌   ▚▄ ▞▀▖▝▀▖▛▀▖                 │
       │  ▌▚ ▐ ▚▄▌   ▖ ▌▌ ▖▞▀▌▌ ▌                 │
       │  ▘ ▘▀▘▗▄▘   ▝▀ ▝▀ ▝▀▘▘ ▘   ⛏  :4028      │
       └──────────────────────────────────────────┘
"#;

const BANNER_2: &str = r#"
            ___  _  __  ___  ___  __   _  _
           | _ \| |/ _|/ __|/ __|/  \ | \| |
           |   /| | (_ \__ \ (__| () || .` |
           |_|_\|_|\__||___/\___|\__/ |_|\_|
"#;

pub fn print() {
    let banner: ColoredString = match rand::random_range(0..3u8) {
        0 => BANNER_0.red(),
        1 => BANNER_1.truecolor(255, 165, 0),
        _ => BANNER_2.green(),
    };
    print::print(&banner.to_string());
}
