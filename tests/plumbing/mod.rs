mod hash_and_cat_files;
