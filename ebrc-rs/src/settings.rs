//! Interactive toggles that a function may change while it runs.
//!
//! The interpreter snapshots the whole set before running an ordinary
//! function and puts it back afterwards, so a function that turns off
//! JavaScript or switches agent does not leak that change to its caller.

/// How directory listings may be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirWrite {
    #[default]
    ReadOnly,
    /// Renames and deletes go to the trash.
    Recycle,
    /// Deletes are immediate.
    Remove,
}

/// Progress reporting during downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Progress {
    Off,
    #[default]
    Dots,
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// User-agent string in effect.
    pub current_agent: String,
    /// Index of `current_agent` in the agent table.
    pub agent_index: usize,
    pub debug_level: u8,
    pub timer_speed: u32,
    pub dir_write: DirWrite,
    /// Sort key for directory listings: 0 name, 1 size, 2 time.
    pub ls_sort: u8,
    pub ls_reverse: bool,
    /// Columns shown by `ls`, one letter each.
    pub ls_format: String,
    pub show_progress: Progress,
    pub down_bg: bool,
    pub down_jsbg: bool,
    pub iu_convert: bool,
    pub binary_detect: bool,
    pub input_readline: bool,
    pub curl_auth_negotiate: bool,
    pub list_na: bool,
    pub fetch_blob_columns: bool,
    pub search_wrap: bool,
    pub ebre: bool,
    pub allow_redirection: bool,
    pub send_referrer: bool,
    pub allow_js: bool,
    pub ftp_active: bool,
    pub help_messages: bool,
    pub plugins_on: bool,
    pub show_hidden_files: bool,
    pub show_hover: bool,
    pub end_marks: bool,
    pub search_strings_all: bool,
    pub case_insensitive: bool,
    pub re_utf8: bool,
    pub verify_certificates: bool,
}

impl Settings {
    /// Defaults with `agent` as the current user agent.
    pub fn with_agent(agent: impl Into<String>) -> Self {
        Self {
            current_agent: agent.into(),
            agent_index: 0,
            debug_level: 1,
            timer_speed: 1,
            dir_write: DirWrite::default(),
            ls_sort: 0,
            ls_reverse: false,
            ls_format: String::new(),
            show_progress: Progress::default(),
            down_bg: false,
            down_jsbg: false,
            iu_convert: true,
            binary_detect: true,
            input_readline: false,
            curl_auth_negotiate: false,
            list_na: false,
            fetch_blob_columns: false,
            search_wrap: true,
            ebre: true,
            allow_redirection: true,
            send_referrer: true,
            allow_js: true,
            ftp_active: false,
            help_messages: false,
            plugins_on: true,
            show_hidden_files: false,
            show_hover: false,
            end_marks: false,
            search_strings_all: false,
            case_insensitive: false,
            re_utf8: true,
            verify_certificates: true,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_agent(crate::config::default_agent())
    }
}
