mod feed_event;
