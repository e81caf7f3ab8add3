pub mod compile_time {
    pub mod file_processing {
        /// Maximum input file size accepted for decoding (10MB)
        /// SECURITY: Bounds memory used by a single input deck
        pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

        /// Maximum number of lines in an input file
        pub const MAX_LINE_COUNT: usize = 1_000_000;

        /// File extensions recognised as legacy input decks
        pub const LEGACY_EXTENSIONS: &[&str] = &["in", "inp", "apbs"];

        /// File extensions recognised as structured input documents
        pub const STRUCTURED_EXTENSIONS: &[&str] = &["json", "toml"];
    }

    pub mod lexical {
        /// Maximum length of a single whitespace-delimited word
        /// SECURITY: Prevents pathological tokens from exhausting memory
        pub const MAX_WORD_LENGTH: usize = 4096;

        /// Maximum number of tokens allowed in a single file
        /// SECURITY: Prevents token explosion
        pub const MAX_TOKEN_COUNT: usize = 1_000_000;

        /// Maximum comment length
        pub const MAX_COMMENT_LENGTH: usize = 10_000;
    }

    pub mod syntax {
        /// Maximum number of top-level sections in one input deck
        pub const MAX_SECTIONS: usize = 10_000;

        /// Maximum number of directives within one section
        pub const MAX_DIRECTIVES_PER_SECTION: usize = 10_000;

        /// Width of the `=` and `-` rules in diagnostic banners
        pub const BANNER_WIDTH: usize = 70;
    }

    pub mod grid {
        /// Smallest multigrid level a finite-difference grid must admit
        pub const MIN_LEVEL: u32 = 4;
    }

    pub mod logging {
        /// Log buffer size for the in-memory logger
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log message length before truncation
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 10_000;
    }
}
