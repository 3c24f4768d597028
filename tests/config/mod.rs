mod configure_settings;
