mod notifier;

pub use notifier::{
    NewNotifier, NotifierRecord, NotifierSettings, SettingsKind, TelegramSettings,
    TelegramSettingsRow,
};
