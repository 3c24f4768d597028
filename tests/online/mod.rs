mod go_online;
